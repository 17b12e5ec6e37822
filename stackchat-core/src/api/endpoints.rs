//! Backend routes, relative to the configured base URL.

pub const LOGIN: &str = "/app_auth/login/";
pub const LOGOUT: &str = "/app_auth/logout/";
pub const TOKEN_REFRESH: &str = "/app_auth/token/refresh/";

pub const USER_CREATE: &str = "/user/create/";
pub const USER_READ: &str = "/user/read/";
pub const USER_UPDATE: &str = "/user/update/";
pub const USER_DELETE: &str = "/user/delete/";

pub const TRAIN_MODEL: &str = "/app_model/train/model/";
pub const MONITOR_TRAINING: &str = "/app_model/monitor/training/";
pub const SEARCH_INFORMATION: &str = "/app_model/search/information/";

pub const CHAT_LIST: &str = "/app_model/chat/list/";
pub const CHAT_CREATE: &str = "/app_model/chat/create/";

pub fn chat_delete(chat_id: i64) -> String {
    format!("/app_model/chat/{}/delete/", chat_id)
}

pub fn message_list(chat_id: i64) -> String {
    format!("/app_model/message/{}/list/", chat_id)
}

pub fn message_create(chat_id: i64) -> String {
    format!("/app_model/message/{}/create/", chat_id)
}
