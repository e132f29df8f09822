/// Query description for [`RemoteBackend::select`](crate::RemoteBackend::select).
///
/// Only the handful of PostgREST operators the facade needs: equality
/// filters, a single ordering column, and a row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub filters: Vec<(String, String)>,
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Select {
    /// Select every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Select the row with the given id.
    pub fn by_id(id: &str) -> Self {
        Self::all().eq("id", id)
    }

    /// Add a `column = value` filter.
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    /// Order by `column` descending.
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some((column.to_string(), false));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Render as PostgREST query parameters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        for (column, value) in &self.filters {
            params.push((column.clone(), format!("eq.{}", value)));
        }
        if let Some((column, asc)) = &self.order {
            let dir = if *asc { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", column, dir)));
        }
        if let Some(n) = self.limit {
            params.push(("limit".to_string(), n.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_postgrest_params() {
        let q = Select::by_id("A1").order_desc("created_at").limit(5).to_query();
        assert_eq!(
            q,
            vec![
                ("select".to_string(), "*".to_string()),
                ("id".to_string(), "eq.A1".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn all_selects_everything() {
        assert_eq!(Select::all().to_query(), vec![("select".to_string(), "*".to_string())]);
    }
}
