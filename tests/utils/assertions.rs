//! Test assertion helpers - fluent API for verifying API responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use serde_json::Value;

use super::actions::ApiResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a ApiResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a ApiResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    /// Assert the `{"error": ...}` body contains the given text
    pub fn has_error(self, expected: &str) -> Self {
        let message = self.response.body["error"].as_str().unwrap_or_default();
        assert!(
            message.contains(expected),
            "expected error containing '{}', got '{}'",
            expected,
            message
        );
        self
    }

    pub fn has_field(self, field: &str, expected: Value) -> Self {
        assert_eq!(self.response.body[field], expected, "field {}", field);
        self
    }

    pub fn is_list_with_len(self, expected: usize) -> Self {
        let items = self
            .response
            .body
            .as_array()
            .expect("response body is not a list");
        assert_eq!(items.len(), expected);
        self
    }

    pub fn is_list_with_at_most(self, max: usize) -> Self {
        let items = self
            .response
            .body
            .as_array()
            .expect("response body is not a list");
        assert!(items.len() <= max, "{} items > {}", items.len(), max);
        self
    }
}
