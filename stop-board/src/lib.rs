//! KMB bus stop board.
//!
//! A web application for browsing bus stops, checking upcoming arrivals
//! at a stop, and keeping a list of favorite stops.

pub mod config;
pub mod directory;
pub mod domain;
pub mod favorites;
pub mod storage;
pub mod web;
