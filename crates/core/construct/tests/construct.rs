use construct::to_construct;
use envelope::{EditKind, decode};

#[test]
fn maps_happy_path_sparse_envelope() {
    let doc = r#"{
      "meta": {"pType": "BMA", "wType": "4Q", "VNnr": "VN123456", "Kunde": "Musterkunde GmbH"},
      "protokoll": {
        "melderTypes": ["I", "R"],
        "anlagen": [
          {
            "name": "Haupthaus",
            "melder": {
              "grid": {"rowCount": 2, "colCount": 3, "cells": [{"r": 1, "c": 0, "v": "AM"}]}
            }
          }
        ]
      }
    }"#;
    let env = decode(doc).expect("decode");
    let c = to_construct(&env);

    assert_eq!(c.p_type, "BMA");
    assert_eq!(c.w_type, "4Q");
    assert_eq!(c.vn, "VN123456");
    assert_eq!(c.kunde, "Musterkunde GmbH");
    assert_eq!(c.dropped_anlagen, 0);
    assert_eq!(c.anlagen.len(), 1);

    let anlage = &c.anlagen[0];
    assert_eq!(anlage.name, "Haupthaus");
    assert_eq!(anlage.melder.rows[1], vec!["AM", "", ""]);
    // 主表未声明的列默认 MelderType 编辑器
    assert_eq!(anlage.melder.editors, vec![EditKind::MelderType; 3]);
    assert!(anlage.hardware.is_none());
}

#[test]
fn drops_anlagen_without_melder_table_but_counts_them() {
    let doc = r#"{
      "meta": {"pType": "BMA", "wType": "1J", "VNnr": "VN1"},
      "protokoll": {
        "anlagen": [
          {"name": "Nur Hardware", "hardware": {"grid": {"rowCount": 0, "colCount": 2, "cells": []}}},
          {"name": "Leer"},
          {"name": "Gültig", "melder": {"grid": {"rowCount": 1, "colCount": 1, "cells": []}}}
        ]
      }
    }"#;
    let env = decode(doc).expect("decode");
    let c = to_construct(&env);

    assert_eq!(c.anlagen.len(), 1);
    assert_eq!(c.anlagen[0].name, "Gültig");
    assert_eq!(c.dropped_anlagen, 2);
}

#[test]
fn hardware_table_defaults_to_string_editors() {
    let doc = r#"{
      "meta": {"pType": "BMZ", "wType": "2Q", "VNnr": "VN2"},
      "protokoll": {
        "anlagen": [
          {
            "name": "Lager",
            "melder": {
              "head": {"rows": [["Nr", "Q1"]], "spans": [{"r0": 0, "c0": 0, "r1": 0, "c1": 1}]},
              "grid": {
                "rowCount": 1,
                "colCount": 2,
                "columnsEditable": {"0": "int"},
                "body": [[{"v": 1}, {"v": "i.O.", "t": "p"}]],
                "qStartCol": 1
              },
              "itemsEditable": true
            },
            "hardware": {
              "grid": {"rowCount": 1, "colCount": 2, "columnsEditable": {"1": "int"}, "body": [[{"v": "BMZ"}, {"v": 2}]]}
            }
          }
        ]
      }
    }"#;
    let env = decode(doc).expect("decode");
    let c = to_construct(&env);
    let anlage = &c.anlagen[0];

    assert_eq!(anlage.melder.editors, vec![EditKind::Int, EditKind::MelderType]);
    assert_eq!(anlage.melder.q_start_col, Some(1));
    assert!(anlage.melder.items_editable);
    assert_eq!(anlage.melder.header, vec![vec!["Nr", "Q1"]]);
    assert_eq!(anlage.melder.spans.as_ref().map(|s| s.len()), Some(1));

    let hw = anlage.hardware.as_ref().expect("hardware");
    assert_eq!(hw.editors, vec![EditKind::String, EditKind::Int]);
    assert_eq!(hw.rows, vec![vec!["BMZ", "2"]]);
    assert_eq!(hw.q_start_col, None);
    assert!(!hw.items_editable);
}
