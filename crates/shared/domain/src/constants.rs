/// Key that carries the discriminator in a configuration mapping.
pub const DISCRIMINATOR_KEY: &str = "type";
/// Key that names the looked-up entry inside an alter marker mapping.
pub const ALTER_KEY: &str = "key";
/// Marker for values sourced from a user supplied tree.
pub const USER_DICT: &str = "user_dict";
/// Marker for values sourced from environment variables.
pub const ENV: &str = "ENV";
/// Key holding the sweep definition in a configuration document.
pub const SEARCH_KEY: &str = "search";
/// Environment prefix for engine settings (`FORMA__LIMITS__MAX_DEPTH`).
pub const ENV_PREFIX: &str = "FORMA";
