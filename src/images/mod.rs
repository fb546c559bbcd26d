// Image URL resolution: CDN names, alternative proxy, placeholders and picture policies.

pub mod codec;

use crate::config::{FeedConfig, PictureFilter};
use crate::model::{Position, Properties, SkipReason};

pub const CDN_BASE: &str = "https://pubimg.nodacdn.net/images/";
pub const FILE_SUFFIX: &str = "0005";
pub const MAX_IMAGES: usize = 10;

const PLACEHOLDER_PNG: &str = "05c40c050e1eeef58efb8bcf8e6ce2510b.png";
const PLACEHOLDER_JPG: &str = "1149f97a082eb731bab1e4d0bb281be3e8.jpg";
const JPG_REQUEST_METHOD: &str = "URL-JPG";

/// Image options of one task.
#[derive(Debug, Clone, Default)]
pub struct ImageSettings {
    pub proxy: String,
    pub proxy_disabled: bool,
    pub always_generate: bool,
    pub request_method: String,
    pub update_photo: bool,
    pub update_photo_count: i64,
    /// Positive values are appended to every URL as `?N`.
    pub image_inc: i64,
    pub exclude_without_picture: bool,
    pub filter: PictureFilter,
}

impl ImageSettings {
    pub fn new(feed: &FeedConfig, image_inc: i64) -> Self {
        Self {
            proxy: feed.alternative_image_proxy.clone(),
            proxy_disabled: feed.disable_alternative_image,
            always_generate: feed.always_generate_image,
            request_method: feed.alternative_image_request_method.clone(),
            update_photo: feed.update_photo,
            update_photo_count: feed.update_photo_count,
            image_inc,
            exclude_without_picture: feed.exclude_offers_without_picture,
            filter: feed.filter_offers_picture,
        }
    }
}

/// Brand or number as a path segment of the proxy: lower case, `/` -> `-`,
/// punctuation removed (numbers also lose spaces).
pub fn normalize_path_part(value: &str, is_number: bool) -> String {
    value
        .to_lowercase()
        .replace('/', "-")
        .chars()
        .filter(|c| !matches!(c, '\\' | '.' | ',' | '"' | '\r' | '\n'))
        .filter(|c| !(is_number && *c == ' '))
        .collect()
}

pub struct ImageResolver {
    settings: ImageSettings,
}

impl ImageResolver {
    pub fn new(settings: ImageSettings) -> Self {
        Self { settings }
    }

    fn proxy_base(&self) -> &str {
        self.settings.proxy.trim_end_matches('/')
    }

    fn with_inc(&self, url: String) -> String {
        if self.settings.image_inc > 0 {
            format!("{}?{}", url, self.settings.image_inc)
        } else {
            url
        }
    }

    /// URL of one image file name.
    pub fn image_url(&self, name: &str, brand: &str, number: &str) -> String {
        let s = &self.settings;
        if !s.proxy.is_empty() && !s.proxy_disabled {
            let brand = urlencoding::encode(&normalize_path_part(brand, false)).into_owned();
            let number = urlencoding::encode(&normalize_path_part(number, true)).into_owned();
            let mut url = format!("{}/images/{}/{}/full/{}", self.proxy_base(), brand, number, name);
            if s.update_photo || s.update_photo_count != 0 {
                url.push_str(&format!("?{}", s.update_photo_count));
            }
            return url;
        }

        if name.contains("http://") || name.contains("https://") {
            return name.to_string();
        }
        format!("{}{}", CDN_BASE, codec::add_suffix(&codec::encode(name), FILE_SUFFIX))
    }

    fn collect<'n>(&self, names: impl IntoIterator<Item = &'n str>, pos: &Position) -> Vec<String> {
        let limit = if self.settings.proxy.is_empty() { MAX_IMAGES } else { 1 };
        names
            .into_iter()
            .take(limit)
            .map(|name| self.with_inc(self.image_url(name, &pos.brand, &pos.number)))
            .collect()
    }

    fn placeholder(&self, pos: &Position) -> String {
        let file = if self.settings.request_method == JPG_REQUEST_METHOD {
            PLACEHOLDER_JPG
        } else {
            PLACEHOLDER_PNG
        };
        let url = format!(
            "{}/images/{}/{}/full/{}",
            self.proxy_base(),
            normalize_path_part(&pos.brand, false),
            normalize_path_part(&pos.number, true),
            file
        );
        self.with_inc(url)
    }

    /// Image URLs of an offer after the picture policies.
    pub fn resolve(&self, pos: &Position, props: &Properties) -> Result<Vec<String>, SkipReason> {
        let catalog = props.list("images").unwrap_or_default();
        let mut images = self.collect(catalog.iter().map(String::as_str), pos);

        if images.is_empty() && !self.settings.proxy.is_empty() && self.settings.always_generate {
            images.push(self.placeholder(pos));
        }

        if pos.is_used() {
            images = self.collect(pos.used_images.iter().map(String::as_str), pos);
        }

        if images.is_empty() && self.settings.exclude_without_picture {
            return Err(SkipReason::NoPicture);
        }
        match self.settings.filter {
            PictureFilter::OnlyWithPictures if images.is_empty() => Err(SkipReason::PictureFilter),
            PictureFilter::OnlyWithoutPictures if !images.is_empty() => Err(SkipReason::PictureFilter),
            _ => Ok(images),
        }
    }
}
