//! File Handlers - 导出、朗读音频、封面、插图与肖像下载

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;

use crate::application::ports::ExportFormat;
use crate::application::{
    ApplicationError, ExportBook, FileResponse, GetChapterAudio, GetCover, GetIllustration,
    GetPortrait, ImageResponse,
};
use crate::infrastructure::http::dto::{
    BookIdRequest, ChapterRequest, CharacterRequest, ExportBookRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn file_response(file: FileResponse, attachment: bool) -> Response {
    let disposition = if attachment {
        format!("attachment; filename=\"{}\"", file.filename)
    } else {
        format!("inline; filename=\"{}\"", file.filename)
    };
    (
        [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.data,
    )
        .into_response()
}

/// 内联字节直接返回，外部图片重定向
fn image_response(image: ImageResponse) -> Response {
    match image {
        ImageResponse::File(file) => file_response(file, false),
        ImageResponse::Url(url) => Redirect::temporary(&url).into_response(),
    }
}

pub async fn export_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportBookRequest>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = req
        .format
        .parse()
        .map_err(ApplicationError::from)?;

    let file = state
        .export_book_handler
        .handle(ExportBook {
            book_id: req.id,
            format,
        })
        .await?;
    Ok(file_response(file, true))
}

pub async fn chapter_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChapterRequest>,
) -> Result<Response, ApiError> {
    let file = state
        .get_chapter_audio_handler
        .handle(GetChapterAudio {
            book_id: req.id,
            chapter_index: req.chapter,
        })
        .await?;
    Ok(file_response(file, false))
}

pub async fn cover(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookIdRequest>,
) -> Result<Response, ApiError> {
    let cover = state
        .get_cover_handler
        .handle(GetCover { book_id: req.id })
        .await?;

    Ok(image_response(cover))
}

pub async fn portrait(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CharacterRequest>,
) -> Result<Response, ApiError> {
    let portrait = state
        .get_portrait_handler
        .handle(GetPortrait {
            book_id: req.id,
            index: req.index,
        })
        .await?;
    Ok(image_response(portrait))
}

pub async fn illustration(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChapterRequest>,
) -> Result<Response, ApiError> {
    let illustration = state
        .get_illustration_handler
        .handle(GetIllustration {
            book_id: req.id,
            chapter_index: req.chapter,
        })
        .await?;
    Ok(image_response(illustration))
}
