mod cart;
mod category;
mod envelope;
pub mod geo;
mod order;
mod populated;
mod product;
mod upload;
mod user;

pub use cart::*;
pub use category::*;
pub use envelope::*;
pub use geo::GeoPoint;
pub use order::*;
pub use populated::*;
pub use product::*;
pub use upload::*;
pub use user::*;
