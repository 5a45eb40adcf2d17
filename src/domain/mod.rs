pub mod cart;
pub mod category;
pub mod price;
pub mod product;
pub mod slug;
