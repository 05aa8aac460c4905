//! Exam bank backend: question groups, questions and their attachments,
//! ordered per part and across the whole exam.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod repository;
pub mod service;
pub mod storage;
