use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub username: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnlikeRequest {
    pub username: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
}
