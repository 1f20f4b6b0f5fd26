/// The default root of the venue API
pub const DEFAULT_API_ROOT: &str = "https://api.foursquare.com/";

/// The default `User-Agent` sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("venuescope/", env!("CARGO_PKG_VERSION"));

/// Path segments of the venue explore endpoint, relative to the API root
pub const EXPLORE_PATH: [&str; 3] = ["v2", "venues", "explore"];

/// Fixed query parameters shaping the explore response
pub const EXPLORE_SECTION: &str = "topPicks";
pub const EXPLORE_VENUE_PHOTOS: &str = "1";
pub const EXPLORE_RADIUS_METERS: &str = "800";
pub const EXPLORE_API_VERSION: &str = "20140926";
pub const EXPLORE_LIMIT: &str = "10";

/// Query parameter carrying the access token
pub const ACCESS_TOKEN_PARAM: &str = "oauth_token";

/// Size token inserted between a category icon's prefix and suffix
pub const CATEGORY_ICON_SIZE: &str = "bg_100";

/// Resolution token inserted between a featured photo's prefix and suffix
pub const VENUE_PHOTO_SIZE: &str = "304x304";

/// Status sentinel the API embeds in successful payloads
pub const API_SUCCESS_CODE: u64 = 200;

/// Location used when the host supplies no usable coordinates
pub const FALLBACK_LOCATION: &str = "40.37,49.84";
