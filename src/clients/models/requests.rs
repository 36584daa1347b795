use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PageQuery {
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct OffsetQuery<'a> {
    pub username: &'a str,
    pub limit: u32,
    pub offset: u32,
}

impl<'a> OffsetQuery<'a> {
    pub fn from_page(username: &'a str, page: u32, page_size: u32) -> Self {
        Self {
            username,
            limit: page_size,
            offset: page.saturating_sub(1).saturating_mul(page_size),
        }
    }
}
