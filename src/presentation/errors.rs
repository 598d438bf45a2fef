// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::subscription_use_case::SubscriptionError;
use crate::application::use_cases::webhook_pipeline::PipelineError;
use crate::domain::repositories::subscription_repository::RepositoryError;
use crate::domain::services::hub_client::HubError;
use crate::workers::renewal_worker::SweepError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，按具体错误类型选择HTTP状态码
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<PipelineError>() {
            return match err {
                PipelineError::Signature(_) => StatusCode::UNAUTHORIZED,
                PipelineError::DuplicateEvent { .. } => StatusCode::OK,
                PipelineError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }

        if let Some(err) = self.0.downcast_ref::<SubscriptionError>() {
            return match err {
                SubscriptionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                SubscriptionError::NotFound => StatusCode::NOT_FOUND,
                SubscriptionError::Hub(hub) => hub_status(hub),
                SubscriptionError::Persistence(repo) => repository_status(repo),
            };
        }

        if let Some(err) = self.0.downcast_ref::<SweepError>() {
            return match err {
                SweepError::AlreadyRunning => StatusCode::CONFLICT,
                SweepError::Listing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }

        if let Some(err) = self.0.downcast_ref::<HubError>() {
            return hub_status(err);
        }

        match self.0.downcast_ref::<RepositoryError>() {
            Some(err) => repository_status(err),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn hub_status(err: &HubError) -> StatusCode {
    match err {
        HubError::SubscriptionFailed { .. } | HubError::InvalidLease { .. } => {
            StatusCode::BAD_REQUEST
        }
        HubError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Duplicate => StatusCode::CONFLICT,
        RepositoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.0.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
