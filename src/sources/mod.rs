pub mod file;
pub mod supabase;
pub mod traits;
pub mod types;

pub use file::JsonFileSource;
pub use supabase::SupabaseSource;
pub use traits::ListingSource;
pub use types::SourceParams;
