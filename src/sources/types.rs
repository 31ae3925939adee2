/// Connection parameters for the hosted backend
#[derive(Debug, Clone)]
pub struct SourceParams {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Anon or service key sent as `apikey` and bearer token
    pub api_key: String,
    pub listings_table: String,
    pub pages_table: String,
    /// Rows requested per round trip
    pub page_size: usize,
    /// Skip listings that are no longer live
    pub active_only: bool,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            listings_table: "listings".to_string(),
            pages_table: "seo_page_content".to_string(),
            page_size: 1000,
            active_only: true,
        }
    }
}
