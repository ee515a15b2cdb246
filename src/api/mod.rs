// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod extract;
pub mod http_server;
pub mod ui;

pub use errors::{ApiError, ErrorResponse};
pub use extract::{extract_handler, extract_upload_handler, ExtractRequest, ExtractResponse};
pub use http_server::{build_state, create_router, start_server, AppState, HealthResponse};
