//! GitHub-style emoji shortcodes.  Valid names become symbol nodes;
//! unknown names stay literal text.

use phf::{phf_map, Map};

pub static EMOJI: Map<&'static str, &'static str> = phf_map! {
    "+1" => "\u{1f44d}",
    "-1" => "\u{1f44e}",
    "100" => "\u{1f4af}",
    "angry" => "\u{1f620}",
    "art" => "\u{1f3a8}",
    "bell" => "\u{1f514}",
    "blush" => "\u{1f60a}",
    "boom" => "\u{1f4a5}",
    "bug" => "\u{1f41b}",
    "bulb" => "\u{1f4a1}",
    "cat" => "\u{1f431}",
    "check" => "\u{2714}",
    "clap" => "\u{1f44f}",
    "cloud" => "\u{2601}",
    "confused" => "\u{1f615}",
    "cool" => "\u{1f192}",
    "cry" => "\u{1f622}",
    "dog" => "\u{1f436}",
    "eyes" => "\u{1f440}",
    "fire" => "\u{1f525}",
    "frowning" => "\u{1f626}",
    "gift" => "\u{1f381}",
    "grin" => "\u{1f601}",
    "grinning" => "\u{1f600}",
    "heart" => "\u{2764}",
    "heavy_check_mark" => "\u{2714}",
    "house" => "\u{1f3e0}",
    "hourglass" => "\u{231b}",
    "joy" => "\u{1f602}",
    "kiss" => "\u{1f48b}",
    "laughing" => "\u{1f606}",
    "lock" => "\u{1f512}",
    "memo" => "\u{1f4dd}",
    "moon" => "\u{1f319}",
    "muscle" => "\u{1f4aa}",
    "neutral_face" => "\u{1f610}",
    "ok" => "\u{1f197}",
    "ok_hand" => "\u{1f44c}",
    "pencil" => "\u{270f}",
    "pray" => "\u{1f64f}",
    "question" => "\u{2753}",
    "rainbow" => "\u{1f308}",
    "rocket" => "\u{1f680}",
    "rose" => "\u{1f339}",
    "sad" => "\u{1f61e}",
    "scream" => "\u{1f631}",
    "smile" => "\u{1f604}",
    "smiley" => "\u{1f603}",
    "smirk" => "\u{1f60f}",
    "sob" => "\u{1f62d}",
    "sparkles" => "\u{2728}",
    "star" => "\u{2b50}",
    "sun" => "\u{2600}",
    "sunglasses" => "\u{1f60e}",
    "tada" => "\u{1f389}",
    "thinking" => "\u{1f914}",
    "thumbsdown" => "\u{1f44e}",
    "thumbsup" => "\u{1f44d}",
    "warning" => "\u{26a0}",
    "wave" => "\u{1f44b}",
    "wink" => "\u{1f609}",
    "zap" => "\u{26a1}",
};
