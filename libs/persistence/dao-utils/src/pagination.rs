use tokio_postgres::types::ToSql;

#[derive(Debug, Clone)]
pub struct PaginationParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PaginationParams {
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }

    pub fn build_query_parts(
        &self, base_query: &str, order_by: &str,
    ) -> (String, Vec<i64>) {
        let mut query = format!("{base_query} {order_by}");
        let mut params = Vec::new();
        let mut param_count = 0;

        match (self.limit, self.offset) {
            (Some(l), Some(o)) => {
                param_count += 2;
                query.push_str(&format!(
                    " LIMIT ${} OFFSET ${}",
                    param_count - 1,
                    param_count
                ));
                params.extend([l as i64, o as i64]);
            }
            (Some(l), None) => {
                param_count += 1;
                query.push_str(&format!(" LIMIT ${param_count}"));
                params.push(l as i64);
            }
            (None, Some(o)) => {
                param_count += 1;
                query.push_str(&format!(" OFFSET ${param_count}"));
                params.push(o as i64);
            }
            (None, None) => {}
        }

        (query, params)
    }
}

pub fn create_param_refs<T: ToSql + Sync>(
    params: &[T],
) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_and_offset_are_numbered_in_order() {
        let pagination = PaginationParams::new(Some(10), Some(20));
        let (sql, params) = pagination
            .build_query_parts("SELECT id FROM category", "ORDER BY name");

        assert_eq!(
            sql,
            "SELECT id FROM category ORDER BY name LIMIT $1 OFFSET $2"
        );
        assert_eq!(params, vec![10, 20]);
    }

    #[test]
    fn no_pagination_leaves_query_untouched() {
        let pagination = PaginationParams::new(None, None);
        let (sql, params) = pagination
            .build_query_parts("SELECT id FROM category", "ORDER BY name");

        assert_eq!(sql, "SELECT id FROM category ORDER BY name");
        assert!(params.is_empty());
    }
}
