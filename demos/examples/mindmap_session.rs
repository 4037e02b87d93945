// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted editing session: load, edit, drag, animate, save.
//!
//! Run:
//! - `cargo run -p understory_demos --example mindmap_session`
//! - `RUST_LOG=debug cargo run -p understory_demos --example mindmap_session`
//!   to see every edit and drag decision.

use kurbo::Point;
use tracing_subscriber::EnvFilter;
use understory_mindmap::{Document, MindMap, Settings};
use understory_scene::{Element, SceneTree};

const FILE: &str = "---\ntype: mindmap-plugin\ntags:\n  - mindmap\n---\n\n<%%\n\n%%>\n\n\
```json\n{\"name\":\"Trip\",\"children\":[{\"name\":\"Packing\",\"left\":false},\
{\"name\":\"Route\",\"left\":false},{\"name\":\"Budget\",\"left\":true}]}\n```\n";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let doc = Document::parse(FILE).expect("demo document parses");
    let mut map = MindMap::new(SceneTree::new(), doc, Settings::default());
    let root = map.store().root();
    let [packing, route, budget] = map.store().children_of(root)[..] else {
        panic!("demo document has three root children");
    };

    map.add(packing, "Tent");
    map.add(packing, "Stove");
    map.add_sibling(budget, "Tickets", false);
    tracing::info!(report = ?map.last_report(), "edited");
    dump(&map, "after edits");

    // Drag "Route" onto "Packing": the pointer starts on Route's label and
    // ends on Packing's.
    let from = map.layout().get(route).map(|n| n.rect().center());
    let to = map.layout().get(packing).map(|n| n.rect().center());
    if let (Some(from), Some(to)) = (from, to) {
        map.pointer_down(from);
        map.pointer_move(Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0));
        let action = map.pointer_up(to);
        tracing::info!(?action, "dropped");
    }

    // Let the transitions run out.
    let mut now = 0.0;
    while map.advance(now) {
        now += 16.0;
    }
    tracing::info!(frames = now / 16.0, "animations settled");
    dump(&map, "after drag");

    println!("{}", map.document().render().expect("document renders"));
}

fn dump(map: &MindMap<SceneTree>, title: &str) {
    println!("== {title} ==");
    for node in map.layout().iter() {
        let text: Vec<&str> = node.lines.iter().map(|l| l.text.as_str()).collect();
        println!(
            "{:indent$}{} {:?} at ({:.0}, {:.0})",
            "",
            node.gkey,
            text.join(" / "),
            node.position.x,
            node.position.y,
            indent = node.depth * 2,
        );
    }
    let labels = map
        .scene()
        .paint_order()
        .into_iter()
        .filter(|&id| matches!(map.scene().element(id), Some(Element::Label { .. })))
        .count();
    println!("{labels} labels on screen, selected: {:?}", map.selected().map(|id| id.to_string()));
}
