use super::DomainError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Result<Self, DomainError> {
        if page == 0 {
            return Err(DomainError::InvalidPage);
        }
        if limit == 0 {
            return Err(DomainError::InvalidLimit);
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// An item of a paginated slice stamped with its 1-based position in the
/// flattened sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numbered<T> {
    pub display_order: u64,
    pub item: T,
}

/// Flattens the items of every group in order, keeps the window selected by
/// `request`, and re-buckets the survivors under their original group.
/// Groups left without items are dropped.
pub fn slice_groups<G, T>(
    groups: Vec<(G, Vec<T>)>,
    request: PageRequest,
) -> Vec<(G, Vec<Numbered<T>>)> {
    let start = request.skip();
    let end = start.saturating_add(request.limit());
    let mut position: u64 = 0;
    let mut sliced = Vec::new();

    for (group, items) in groups {
        let mut kept = Vec::new();
        for item in items {
            if position >= start && position < end {
                kept.push(Numbered {
                    display_order: position + 1,
                    item,
                });
            }
            position += 1;
        }
        if !kept.is_empty() {
            sliced.push((group, kept));
        }
        if position >= end {
            break;
        }
    }

    sliced
}
