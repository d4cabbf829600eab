pub mod order_const {
    pub const ORDER_TABLE: &str = "orders";

    pub const ADMIN_COOKIE: &str = "pegrio_admin_token";

    /// Portal tokens are always 32 alphanumeric chars; anything else is
    /// rejected before touching the database.
    pub const PORTAL_TOKEN_LEN: usize = 32;

    pub const DB_NAMESPACE: &str = "pegrio";
    pub const DB_DATABASE: &str = "pegrio";
}
