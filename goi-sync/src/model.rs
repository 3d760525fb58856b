//! Card model definition and initialization
//!
//! Static templates and styling for the sync deck's note model, plus the
//! create-or-update flow against the card store. The templates are
//! presentation only; field content is produced by the entry assembler.

use goi_common::anki::AnkiClient;
use goi_common::Result;

use crate::normalize::dedent;

/// Name of the single card template on the model.
pub const CARD_NAME: &str = "Card";

/// Tags attached to newly created notes.
pub const NEW_NOTE_TAGS: &[&str] = &["new"];

const HIGHLIGHT_COLOR: &str = "#ffd154";
const MUTED_COLOR: &str = "#c0c0c0";

/// Model fields, in deck order. `expression` through `image` are the
/// display fields; `scraper-*` and `curated-*` mirror the source decks
/// for reference and re-syncing.
pub const FIELDS: &[&str] = &[
    "key",
    "expression",
    "expression-alt",
    "reading",
    "furigana",
    "frequency",
    "audio",
    "radicals",
    "notes",
    "kanji",
    "glossary",
    "image",
    "example-main",
    "example-text",
    "example-read",
    "example-audio",
    "example-image",
    "scraper-id",
    "scraper-audio",
    "scraper-glossary",
    "scraper-sentence",
    "curated-id",
    "curated-index",
    "curated-order",
    "curated-audio",
    "curated-sentence-read",
];

const STATS: &str = concat!(
    r#"<div style="position: absolute; top: 10px; right: 10px; color: %GREY%; opacity: 0.5; font-size: 0.4em">"#,
    "{{#curated-index}}&nbsp;#{{curated-index}}{{/curated-index}}",
    "{{#curated-order}}&nbsp;/&nbsp;{{curated-order}}{{/curated-order}}",
    "{{#frequency}}&nbsp;({{frequency}}){{/frequency}}",
    "</div>",
);

const FRONT: &str = r#"
    <h1 class="reading">{{furigana}}</h1>
    {{#expression-alt}}<h2 class="reading">({{expression-alt}})</h2>{{/expression-alt}}
    %STATS%

    {{#example-read}}
    <hr><span class="reading">{{example-read}}</span>
    {{/example-read}}

    <script>
    %SCRIPT%</script>
"#;

const BACK: &str = r#"
    <h1 class="reading">
    {{furigana}}
    <span class="audio">{{audio}} {{^audio}}{{tts ja_JP:expression}}{{/audio}}</span>
    </h1>
    {{#expression-alt}}<h2 class="reading">({{expression-alt}})</h2>{{/expression-alt}}
    %STATS%

    {{#example-read}}
    <div style="position: relative">
    <hr>
    <span class="reading" title="{{example-text}}">{{example-read}}</span>
    <span class="audio">{{example-audio}}</span>
    </div>
    {{/example-read}}

    <hr>
    {{#reading}}
    <div style="font-size: 0.5em; font-family: Japanese-alt; color: %GREY%; opacity: 0.7">{{reading}}</div>
    {{/reading}}
    <div class="glossary">{{glossary}}</div>
"#;

const CSS: &str = r#"
    @font-face {
        font-family: Main;
        src: url("_Roboto-Light.ttf")
    }

    @font-face {
        font-family: Japanese;
        src: url("_HGSKyokashotai.ttf");
    }

    @font-face {
        font-family: Japanese-alt;
        src: url("_NotoSansCJKjp-Thin.otf");
    }

    @font-face {
        font-family: Radicals;
        src: url("_JapaneseRadicals-Regular.ttf")
    }

    .card {
        font-size: 5vw;
        text-align: center;
        font-family:
            Main, Japanese,
            'ヒラギノ角ゴ ProN', 'Hiragino Kaku Gothic ProN', '游ゴシック', '游ゴシック体',
            YuGothic, 'Yu Gothic', 'メイリオ', Meiryo, 'ＭＳ ゴシック', 'MS Gothic',
            HiraKakuProN-W3, 'TakaoExゴシック', TakaoExGothic, 'MotoyaLCedar',
            'Droid Sans Japanese',
            "calibri", "Candara", "Segoe", "Segoe UI", "Optima", Arial, sans-serif;
    }

    h1, h2       { font-weight: normal; font-size: 1.5em; position: relative; }
    h2           { font-size: 1.1em;  }
    h1 + h2      { margin-top: -0.3em; }
    h1 rt, h2 rt { font-size: 0.3em;  }

    a, a:visited, a:hover { color: #bfdfff !important; text-decoration: none; }

    rt { color: %HIGH%; visibility: hidden; font-family: Japanese-alt; }
    .reading { cursor: pointer; }

    .audio { display: inline-block; position: absolute; right: 10px; transform: scale(0.5); margin-top: -0.15em; }

    .radical { font-family: Radicals, Japanese; }

    .glossary { font-size: 0.5em; display: inline-block; text-align: left; max-width: 70%; }
    .glossary em { display: inline-block; margin-left: 20px; font-size: 0.9em; font-style: normal; color: %HIGH%; float: right; }

    .tag-tooltip {
        position: absolute;
        background: #333;
        color: #eee;
        font-size: 0.8em;
        padding: 2px 8px;
        border-radius: 4px;
        white-space: nowrap;
        z-index: 10;
    }
"#;

/// Model name for a deck.
pub fn model_name(deck: &str) -> String {
    format!("{}_model", deck)
}

/// Front template with the embedded card script.
pub fn front_template() -> String {
    fill(FRONT).replace("%SCRIPT%", include_str!("../assets/card-script.js"))
}

/// Back template.
pub fn back_template() -> String {
    fill(BACK)
}

/// Card styling.
pub fn styling() -> String {
    fill(CSS)
}

fn fill(template: &str) -> String {
    dedent(template)
        .replace("%STATS%", &STATS.replace("%GREY%", MUTED_COLOR))
        .replace("%HIGH%", HIGHLIGHT_COLOR)
        .replace("%GREY%", MUTED_COLOR)
}

/// Initialize the deck and model in the card store: create the deck,
/// then create the model or refresh its templates and styling.
pub async fn init_model(client: &AnkiClient, deck: &str) -> Result<()> {
    let deck_id = client.create_deck(deck).await?;
    tracing::info!(deck = %deck, id = deck_id, "Deck ready");

    let model = model_name(deck);
    let has_model = client.model_names().await?.contains(&model);

    let front = front_template();
    let back = back_template();
    let css = styling();

    if !has_model {
        client
            .create_model(&model, FIELDS, &css, CARD_NAME, &front, &back)
            .await?;
        tracing::info!(model = %model, "Model created");
    } else {
        client
            .update_model_templates(&model, CARD_NAME, &front, &back)
            .await?;
        client.update_model_styling(&model, &css).await?;
        tracing::info!(model = %model, "Model templates and styling updated");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_are_dedented_and_spliced() {
        let front = front_template();
        assert!(front.starts_with("<h1 class=\"reading\">{{furigana}}</h1>"));
        assert!(front.contains("installTooltip"));
        assert!(!front.contains("%SCRIPT%"));
        assert!(!front.contains("%STATS%"));
        assert!(front.contains("{{#curated-index}}"));
    }

    #[test]
    fn styling_has_no_placeholders_left() {
        let css = styling();
        assert!(css.contains(HIGHLIGHT_COLOR));
        assert!(css.contains(MUTED_COLOR));
        assert!(!css.contains("%HIGH%"));
        assert!(!css.contains("%GREY%"));
    }

    #[test]
    fn field_list_is_complete_and_distinct() {
        assert_eq!(FIELDS.len(), 26);
        assert!(FIELDS.contains(&"glossary"));
        let mut unique: Vec<&&str> = FIELDS.iter().collect();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), FIELDS.len());
    }

    #[test]
    fn model_name_derives_from_deck() {
        assert_eq!(model_name("Vocabulary"), "Vocabulary_model");
    }
}
