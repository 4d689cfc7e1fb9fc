pub use super::list_movies::Entity as ListMovies;
pub use super::lists::Entity as Lists;
pub use super::movies::Entity as Movies;
pub use super::users::Entity as Users;
