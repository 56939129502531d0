use envelope::{DecodeError, Grid, decode, encode};

/// 旧格式：稀疏 cells、大写字段拼写、合同号在 Protokoll.VN。
const SPARSE_DOC: &str = r#"{
  "meta": {"PType": "BMA", "WType": "4Q", "schemaVersion": "1", "generatedAt": "2024-11-02T10:00:00Z"},
  "Protokoll": {
    "MelderTypes": ["I", "R", "DM"],
    "VN": "VN123456",
    "Kdn": "Musterkunde GmbH",
    "Anlagen": [
      {
        "Name": "Haupthaus",
        "Melder": {
          "head": {
            "rows": [["Gruppe", "Ort", "Typ"]],
            "spans": [{"r0": 0, "c0": 0, "r1": 0, "c1": 2, "label": "Melderübersicht"}]
          },
          "grid": {
            "rowCount": 2,
            "colCount": 3,
            "columnsEditable": {"1": "string", "2": "melderType"},
            "cells": [
              {"r": 0, "c": 0, "v": "MG 1"},
              {"r": 1, "c": 0, "v": "AM", "t": "frei"},
              {"r": 5, "c": 9, "v": "verirrt"}
            ]
          }
        }
      }
    ]
  }
}"#;

/// 新格式：稠密 body、小写字段拼写、合同号在 Meta.VNnr。
const DENSE_DOC: &str = r#"{
  "Meta": {"pType": "BMZ", "wType": "2Q", "VNnr": "VN654321", "Kunde": "Beispiel AG"},
  "Protokoll": {
    "melderTypes": ["I"],
    "editedBy": {"name": "ProtokollServer", "ts": "2025-01-10T08:30:00Z"},
    "anlagen": [
      {
        "name": "Lager",
        "melder": {
          "head": {"rows": [["Nr", "Ort", "Q1", "Q2"]]},
          "grid": {
            "rowCount": 1,
            "colCount": 4,
            "columnsEditable": {"0": "int", "1": "string"},
            "body": [[{"v": "1"}, {"v": "Keller"}, {"v": "i.O.", "t": "p"}, {"v": null, "t": "p"}]],
            "qStartCol": 2
          },
          "itemsEditable": true
        },
        "hardware": {
          "head": {"rows": [["Bauteil", "Anzahl"]]},
          "grid": {
            "rowCount": 1,
            "colCount": 2,
            "columnsEditable": {"0": "string", "1": "int"},
            "body": [[{"v": "BMZ"}, {"v": 2}]]
          }
        }
      }
    ]
  }
}"#;

#[test]
fn decodes_sparse_variant_with_legacy_spellings() {
    let env = decode(SPARSE_DOC).expect("decode");
    assert_eq!(env.meta.p_type, "BMA");
    assert_eq!(env.meta.w_type, "4Q");
    assert_eq!(env.vertragsnummer(), Some("VN123456"));
    assert_eq!(env.kunde(), Some("Musterkunde GmbH"));
    assert_eq!(env.protokoll.melder_types, vec!["I", "R", "DM"]);

    let anlage = &env.protokoll.anlagen[0];
    assert_eq!(anlage.name, "Haupthaus");
    let melder = anlage.melder.as_ref().expect("melder");
    assert!(!melder.items_editable);
    match &melder.grid {
        Grid::Sparse(grid) => {
            assert_eq!(grid.row_count, 2);
            assert_eq!(grid.col_count, 3);
            assert_eq!(grid.cells.len(), 3);
            // 旧格式的 t 是自由文本类型提示
            assert_eq!(grid.cells[1].t.as_deref(), Some("frei"));
        }
        Grid::Dense(_) => panic!("expected sparse grid"),
    }
}

#[test]
fn decodes_dense_variant_with_current_spellings() {
    let env = decode(DENSE_DOC).expect("decode");
    assert_eq!(env.meta.p_type, "BMZ");
    assert_eq!(env.vertragsnummer(), Some("VN654321"));
    assert_eq!(env.kunde(), Some("Beispiel AG"));

    let anlage = &env.protokoll.anlagen[0];
    let melder = anlage.melder.as_ref().expect("melder");
    assert!(melder.items_editable);
    match &melder.grid {
        Grid::Dense(grid) => {
            assert_eq!(grid.q_start_col, Some(2));
            // 新格式的 t 是季度列目标值
            assert_eq!(grid.body[0][2].t, Some(serde_json::json!("p")));
        }
        Grid::Sparse(_) => panic!("expected dense grid"),
    }
    assert!(anlage.hardware.is_some());
}

#[test]
fn sparse_expansion_renders_display_row() {
    let env = decode(SPARSE_DOC).expect("decode");
    let melder = env.protokoll.anlagen[0].melder.as_ref().expect("melder");
    let rows = melder.grid.to_dense_strings();
    assert_eq!(rows, vec![vec!["MG 1", "", ""], vec!["AM", "", ""]]);
}

#[test]
fn unknown_fields_are_ignored() {
    let doc = r#"{
      "meta": {"pType": "BMA", "wType": "1J", "VNnr": "VN1", "futureField": 7},
      "protokoll": {"anlagen": [], "nextGenFlag": true}
    }"#;
    let env = decode(doc).expect("decode");
    assert!(env.protokoll.anlagen.is_empty());
    assert!(env.protokoll.melder_types.is_empty());
}

#[test]
fn missing_meta_fields_are_rejected() {
    let doc = r#"{"meta": {"wType": "1J", "VNnr": "VN1"}, "protokoll": {"anlagen": []}}"#;
    assert!(matches!(decode(doc), Err(DecodeError::Json(_))));
}

#[test]
fn missing_contract_number_everywhere_is_rejected() {
    let doc = r#"{"meta": {"pType": "BMA", "wType": "1J"}, "protokoll": {"anlagen": []}}"#;
    assert!(matches!(decode(doc), Err(DecodeError::MissingField("VN"))));
}

#[test]
fn non_json_payload_is_a_decode_error() {
    assert!(matches!(decode("#VERSION\t1\n"), Err(DecodeError::Json(_))));
}

#[test]
fn encode_round_trips() {
    let env = decode(DENSE_DOC).expect("decode");
    let text = encode(&env).expect("encode");
    let again = decode(&text).expect("re-decode");
    assert_eq!(again.vertragsnummer(), Some("VN654321"));
    assert_eq!(again.protokoll.anlagen.len(), 1);
    match &again.protokoll.anlagen[0].melder.as_ref().expect("melder").grid {
        Grid::Dense(grid) => assert_eq!(grid.q_start_col, Some(2)),
        Grid::Sparse(_) => panic!("grid variant lost in round trip"),
    }
}
