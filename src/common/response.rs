// src/common/response.rs

use serde::{Deserialize, Serialize};

/// Envelope padrão das respostas de sucesso: `{ success, data, error }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data, error: None }
    }
}

/// Listagens paginadas carregam, além do envelope, os totais.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub error: Option<String>,
    pub count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, count: i64, pagination: &Pagination) -> Self {
        Self {
            success: true,
            data,
            error: None,
            count,
            page: pagination.page(),
            limit: pagination.limit(),
            total_pages: pagination.total_pages(count),
        }
    }
}

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

// Parâmetros de paginação e ordenação vindos da query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl Pagination {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }

    // Páginas absurdas saturam em vez de estourar
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn total_pages(&self, count: i64) -> i64 {
        let limit = self.limit();
        (count + limit - 1) / limit
    }

    /// Resolve a coluna de ordenação contra uma lista permitida.
    /// Colunas fora da lista caem no padrão, nunca chegam ao SQL.
    pub fn order_clause(&self, allowed: &[&'static str], default: &'static str) -> String {
        let column = self
            .sort_by
            .as_deref()
            .and_then(|s| allowed.iter().find(|c| **c == s).copied())
            .unwrap_or(default);

        let direction = match self.sort_order.as_deref() {
            Some(o) if o.eq_ignore_ascii_case("desc") => "DESC",
            _ => "ASC",
        };

        format!("{} {}", column, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_caps() {
        let p = Pagination::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), DEFAULT_LIMIT);
        assert_eq!(p.offset(), 0);

        let p = Pagination { page: Some(3), limit: Some(500), ..Default::default() };
        assert_eq!(p.limit(), MAX_LIMIT);
        assert_eq!(p.offset(), 200);

        let p = Pagination { page: Some(0), limit: Some(-4), ..Default::default() };
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let p = Pagination { page: Some(i64::MAX), limit: Some(100), ..Default::default() };
        assert_eq!(p.page(), i64::MAX);
        assert_eq!(p.offset(), i64::MAX);

        let p = Pagination { page: Some(i64::MAX), ..Default::default() };
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination { limit: Some(10), ..Default::default() };
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
    }

    #[test]
    fn order_clause_rejects_unknown_columns() {
        let allowed = ["nome_completo", "created_at"];

        let p = Pagination {
            sort_by: Some("created_at".into()),
            sort_order: Some("DESC".into()),
            ..Default::default()
        };
        assert_eq!(p.order_clause(&allowed, "nome_completo"), "created_at DESC");

        let p = Pagination {
            sort_by: Some("1; DROP TABLE eleitor".into()),
            ..Default::default()
        };
        assert_eq!(p.order_clause(&allowed, "nome_completo"), "nome_completo ASC");
    }
}
