//! Canned replies for the Dainichi kerosene heater line

use crate::types::{Action, CarouselColumn, Message, Template};

/// Postback data sent by the rich-menu area that opens the product list.
pub const PRODUCT_POSTBACK: &str = "action=dainichi_products";

pub const WELCOME_TEXT: &str = "歡迎來到大日煤油暖爐專區！有任何問題歡迎詢問客服。";

const PRODUCT_ALT_TEXT: &str = "大日煤油暖爐商品列表";
const PRODUCT_INTRO: &str = "大日 Dainichi 煤油暖爐商品列表：";
const PRODUCT_URL: &str = "https://www.dainichi-net.co.jp/";

// Platform limits for a carousel template.
pub const MAX_CAROUSEL_COLUMNS: usize = 10;
pub const MAX_COLUMN_TITLE_CHARS: usize = 40;
pub const MAX_COLUMN_TEXT_CHARS: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub model: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
}

pub const CATALOG: &[Product] = &[
    Product {
        model: "FW-3224S",
        title: "FW-3224S 經典款",
        summary: "適用 6-8 坪，約 40 秒快速點火，低噪音運轉",
    },
    Product {
        model: "FW-5724L",
        title: "FW-5724L 大坪數",
        summary: "適用 9-12 坪，9L 大油箱，長時間穩定供暖",
    },
    Product {
        model: "FW-2524N",
        title: "FW-2524N 輕巧款",
        summary: "適用 4-6 坪，省油節能模式，兒童安全鎖",
    },
    Product {
        model: "FM-10C",
        title: "FM-10C 業務用",
        summary: "適用 15-20 坪，店面與工作空間專用",
    },
];

/// Product list reply: a plain-text summary followed by a carousel.
pub fn product_list_reply() -> Vec<Message> {
    let mut intro = String::from(PRODUCT_INTRO);
    for product in CATALOG {
        intro.push_str("\n・");
        intro.push_str(product.title);
    }

    let columns = CATALOG
        .iter()
        .take(MAX_CAROUSEL_COLUMNS)
        .map(|product| CarouselColumn {
            thumbnail_image_url: None,
            title: product.title.to_string(),
            text: product.summary.to_string(),
            actions: vec![Action::Uri {
                label: "查看詳情".to_string(),
                uri: PRODUCT_URL.to_string(),
            }],
        })
        .collect();

    vec![
        Message::text(intro),
        Message::Template {
            alt_text: PRODUCT_ALT_TEXT.to_string(),
            template: Template::Carousel { columns },
        },
    ]
}

pub fn welcome_reply() -> Vec<Message> {
    vec![Message::text(WELCOME_TEXT)]
}
