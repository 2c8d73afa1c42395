//! Shared test utilities for the git-edit workspace

pub mod git_test_utils;
