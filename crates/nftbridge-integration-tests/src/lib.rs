//! Bridge workflow integration test helpers
