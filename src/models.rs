use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub comment_count: u32,
    pub points: i64,
}

/// A single hit as returned by the Algolia search API.
///
/// Several fields are `null` for some hits (Ask HN posts have no `url`,
/// very fresh stories may lack `num_comments`), so everything except the
/// id is optional here and defaulted when converted into a [`Story`].
#[derive(Debug, Clone, Deserialize)]
pub struct ApiStory {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub num_comments: Option<u32>,
    #[serde(default)]
    pub points: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<ApiStory>,
}

impl From<ApiStory> for Story {
    fn from(hit: ApiStory) -> Self {
        Self {
            id: hit.object_id,
            title: hit.title.unwrap_or_default(),
            url: hit.url.unwrap_or_default(),
            author: hit.author.unwrap_or_default(),
            comment_count: hit.num_comments.unwrap_or(0),
            points: hit.points.unwrap_or(0),
        }
    }
}

impl From<SearchResponse> for Vec<Story> {
    fn from(response: SearchResponse) -> Self {
        response.hits.into_iter().map(Story::from).collect()
    }
}
