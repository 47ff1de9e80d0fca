use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceLink {
    pub name: &'static str,
    pub url: String,
}

/// External search links for studying `topic`.
pub fn resource_links(topic: &str) -> Vec<ResourceLink> {
    let topic = urlencoding::encode(topic.trim());
    vec![
        ResourceLink {
            name: "YouTube",
            url: format!("https://www.youtube.com/results?search_query={topic}+tutorial"),
        },
        ResourceLink {
            name: "GeeksforGeeks",
            url: format!("https://www.google.com/search?q=site:geeksforgeeks.org+{topic}"),
        },
        ResourceLink {
            name: "MIT OCW",
            url: format!("https://ocw.mit.edu/search/?q={topic}"),
        },
        ResourceLink {
            name: "Google Search",
            url: format!("https://www.google.com/search?q={topic}"),
        },
    ]
}
