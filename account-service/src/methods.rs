//! Fully qualified operation names and their access classes.

use common_auth::MethodTable;

pub const REGISTER: &str = "/oauth.OAuth/Register";
pub const TOKEN: &str = "/oauth.OAuth/Token";
pub const REFRESH: &str = "/oauth.OAuth/Refresh";
pub const VERIFY: &str = "/oauth.OAuth/Verify";
pub const PROFILE: &str = "/oauth.OAuth/Profile";
pub const LIST_USERS: &str = "/oauth.OAuth/ListUsers";
pub const DELETE_USER: &str = "/oauth.OAuth/DeleteUser";

pub fn method_table() -> MethodTable {
    MethodTable::builder()
        .public(REGISTER)
        .public(TOKEN)
        .public(REFRESH)
        .public(VERIFY)
        .authenticated(PROFILE)
        .admin_only(LIST_USERS)
        .admin_only(DELETE_USER)
        .build()
}
