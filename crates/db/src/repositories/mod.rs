//! Repositories: zero-sized structs with async functions over `&PgPool`.
//!
//! Plain CRUD returns `sqlx::Error`; paths whose transactions enforce
//! domain rules return [`crate::DbError`].

pub mod catalog_repo;
pub mod collection_repo;
pub mod deck_card_repo;
pub mod deck_repo;
pub mod folder_repo;
pub mod ownership_repo;
pub mod recommendation_repo;
pub mod tag_repo;
pub mod user_repo;

pub use catalog_repo::CatalogRepo;
pub use collection_repo::CollectionRepo;
pub use deck_card_repo::DeckCardRepo;
pub use deck_repo::DeckRepo;
pub use folder_repo::FolderRepo;
pub use ownership_repo::OwnershipRepo;
pub use recommendation_repo::RecommendationRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
