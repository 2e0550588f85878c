//! Book HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{
    DeleteBook, GenerateBook, GeneratePortrait, GetBook, ListBooks, RegenerateCharacter,
};
use crate::infrastructure::http::dto::{
    ApiResponse, BookDetailDto, BookIdRequest, BookSummaryDto, CharacterDto, CharacterRequest,
    Empty, GenerateBookDto, GenerateBookRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 校验配置并提交生成任务，进度通过 WS 推送
pub async fn generate_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateBookRequest>,
) -> Result<Json<ApiResponse<GenerateBookDto>>, ApiError> {
    let command = GenerateBook {
        book_type: req.book_type,
        genre: req.genre,
        tone: req.tone,
        chapter_count: req.chapter_count,
        title: req.title,
        description: req.description,
    };

    let response = state.generate_book_handler.handle(command).await?;
    Ok(Json(ApiResponse::success(response.into())))
}

pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BookSummaryDto>>>, ApiError> {
    let books = state.list_books_handler.handle(ListBooks).await?;
    Ok(Json(ApiResponse::success(
        books.into_iter().map(BookSummaryDto::from).collect(),
    )))
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookIdRequest>,
) -> Result<Json<ApiResponse<BookDetailDto>>, ApiError> {
    let book = state
        .get_book_handler
        .handle(GetBook { book_id: req.id })
        .await?;
    Ok(Json(ApiResponse::success(book.into())))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookIdRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_book_handler
        .handle(DeleteBook { book_id: req.id })
        .await?;
    state.event_publisher.publish_book_deleted(req.id);
    Ok(Json(ApiResponse::ok()))
}

/// 重新生成一个角色，原肖像随之清除
pub async fn regenerate_character(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CharacterRequest>,
) -> Result<Json<ApiResponse<CharacterDto>>, ApiError> {
    let character = state
        .regenerate_character_handler
        .handle(RegenerateCharacter {
            book_id: req.id,
            index: req.index,
        })
        .await?;
    state.event_publisher.publish_book_updated(req.id);
    Ok(Json(ApiResponse::success(character.into())))
}

pub async fn generate_portrait(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CharacterRequest>,
) -> Result<Json<ApiResponse<CharacterDto>>, ApiError> {
    let character = state
        .generate_portrait_handler
        .handle(GeneratePortrait {
            book_id: req.id,
            index: req.index,
        })
        .await?;
    state.event_publisher.publish_book_updated(req.id);
    Ok(Json(ApiResponse::success(character.into())))
}
