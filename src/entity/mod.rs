pub mod categories;
pub mod enums;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod product_categories;
pub mod products;
pub mod users;

pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use product_categories::Entity as ProductCategories;
pub use products::Entity as Products;
pub use users::Entity as Users;
