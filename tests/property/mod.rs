//! Property-based tests for the PCD collection

mod folder_order;
