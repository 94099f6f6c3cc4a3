pub mod audit_logs;
pub mod cart_entries;
pub mod categories;
pub mod items;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_entries::Entity as CartEntries;
pub use categories::Entity as Categories;
pub use items::Entity as Items;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use users::Entity as Users;
