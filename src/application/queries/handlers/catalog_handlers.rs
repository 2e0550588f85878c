//! Catalog Query Handler

use crate::application::queries::GetCatalog;
use crate::domain::book::{BookType, Tone, MAX_CHAPTERS, MIN_CHAPTERS};

#[derive(Debug, Clone)]
pub struct BookTypeEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub genres: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct ToneEntry {
    pub label: &'static str,
    pub phrase: &'static str,
}

#[derive(Debug, Clone)]
pub struct CatalogResponse {
    pub book_types: Vec<BookTypeEntry>,
    pub tones: Vec<ToneEntry>,
    pub min_chapters: u32,
    pub max_chapters: u32,
}

/// GetCatalog Handler
#[derive(Debug, Default)]
pub struct GetCatalogHandler;

impl GetCatalogHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, _query: GetCatalog) -> CatalogResponse {
        CatalogResponse {
            book_types: BookType::ALL
                .iter()
                .map(|t| BookTypeEntry {
                    id: t.as_str(),
                    label: t.label(),
                    genres: t.genres().to_vec(),
                })
                .collect(),
            tones: Tone::ALL
                .iter()
                .map(|t| ToneEntry {
                    label: t.label(),
                    phrase: t.phrase(),
                })
                .collect(),
            min_chapters: MIN_CHAPTERS,
            max_chapters: MAX_CHAPTERS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_all_choices() {
        let catalog = GetCatalogHandler::new().handle(GetCatalog);
        assert_eq!(catalog.book_types.len(), 2);
        assert!(catalog.book_types[0].genres.contains(&"Fantasy"));
        assert_eq!(catalog.tones.len(), Tone::ALL.len());
        assert_eq!((catalog.min_chapters, catalog.max_chapters), (3, 20));
    }
}
