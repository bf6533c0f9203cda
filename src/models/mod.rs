mod short_link;

pub use short_link::{ShortLink, ShortenRequestDto, ShortenResponseDto};
