use url::Url;

pub const SHARE_MESSAGE: &str = "Check your German citizenship eligibility here: ";

const WHATSAPP_BASE: &str = "https://wa.me/";
const FACEBOOK_BASE: &str = "https://www.facebook.com/sharer/sharer.php";

/// Links offered after a successful submission so the user can pass the checker on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub whatsapp: Url,
    pub facebook: Url,
}

pub fn share_links(origin: &Url) -> ShareLinks {
    let origin = origin.as_str().trim_end_matches('/');
    ShareLinks {
        whatsapp: with_query(WHATSAPP_BASE, "text", &format!("{SHARE_MESSAGE}{origin}")),
        facebook: with_query(FACEBOOK_BASE, "u", origin),
    }
}

fn with_query(base: &str, key: &str, value: &str) -> Url {
    let mut url = Url::parse(base).expect("share base URLs are valid");
    url.query_pairs_mut().append_pair(key, value);
    url
}
