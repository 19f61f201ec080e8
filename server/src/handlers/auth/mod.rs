pub mod login_handler;
pub mod refresh_handler;
pub mod userinfo_handler;

pub use login_handler::login;
pub use refresh_handler::refresh;
pub use userinfo_handler::get_user_info;
