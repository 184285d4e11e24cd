pub mod body;
pub mod dispatch;
pub mod domain;
pub mod lookup;
pub mod migrate;
pub mod question;
pub mod schema;
