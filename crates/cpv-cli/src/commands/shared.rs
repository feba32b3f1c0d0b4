//! Views shared by `show` and `review`.

use cpv_core::{BestCandidate, Checkplot, MethodTag, PanelLayout};
use serde::Serialize;

/// The reviewable fields of one checkplot.
#[derive(Debug, Serialize)]
pub struct CheckplotSummary {
    pub identifier: String,
    pub objectid: String,
    pub objectisvar: &'static str,
    pub varperiod: Option<f64>,
    pub varepoch: Option<f64>,
    pub vartags: String,
    pub objecttags: String,
    pub comments: String,
    pub methods: Vec<MethodTag>,
    pub best: Option<String>,
}

impl CheckplotSummary {
    pub fn new(identifier: &str, cp: &Checkplot, best: Option<BestCandidate>) -> Self {
        Self {
            identifier: identifier.to_string(),
            objectid: cp.objectid.clone(),
            objectisvar: cp.varinfo.objectisvar.as_str(),
            varperiod: cp.varinfo.varperiod,
            varepoch: cp.varinfo.varepoch,
            vartags: cp.varinfo.vartags.clone(),
            objecttags: cp.objectinfo.objecttags.clone(),
            comments: cp.objectcomments.clone(),
            methods: cp.present_methods().collect(),
            best: best.map(|b| format!("{}/{}", b.method, b.slot)),
        }
    }
}

/// One rendered panel, flattened for tabular output.
#[derive(Debug, PartialEq, Serialize)]
pub struct PanelRow {
    pub method: MethodTag,
    pub panel: &'static str,
    pub slot: Option<usize>,
    pub period: Option<f64>,
    pub epoch: Option<f64>,
    pub width: f64,
    pub best: bool,
    pub image_bytes: usize,
}

/// Flatten a layout into rows: each group's periodogram, then its candidates.
pub fn panel_rows(layout: &PanelLayout) -> Vec<PanelRow> {
    let mut rows = Vec::new();
    for group in &layout.groups {
        rows.push(PanelRow {
            method: group.method,
            panel: "periodogram",
            slot: None,
            period: None,
            epoch: None,
            width: group.column_width,
            best: false,
            image_bytes: group
                .periodogram
                .image
                .as_ref()
                .map_or(0, |image| image.payload_len()),
        });
        rows.extend(group.candidates.iter().map(|c| PanelRow {
            method: c.method,
            panel: "candidate",
            slot: Some(c.candidate_index),
            period: Some(c.period),
            epoch: Some(c.epoch),
            width: group.column_width,
            best: c.is_current_best,
            image_bytes: c.image.as_ref().map_or(0, |image| image.payload_len()),
        }));
    }
    rows
}

#[cfg(test)]
mod tests {
    use cpv_core::codec::DEFAULT_IMAGE_MIME;
    use cpv_core::panels::build_panels;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn checkplot() -> Checkplot {
        Checkplot::from_value(json!({
            "objectid": "obj001",
            "varinfo": {"objectisvar": true, "varperiod": 0.75, "varepoch": 10.0, "vartags": "ceph"},
            "objectcomments": "clear signal",
            "gls": {
                "periodogram": "AAAA",
                "0": {"period": 0.75, "epoch": 10.0, "plot": "BBBBBBBB"}
            },
            "pdm": {"periodogram": null}
        }))
        .expect("valid checkplot")
    }

    #[test]
    fn rows_follow_layout_order() {
        let cp = checkplot();
        let best = Some(BestCandidate {
            method: MethodTag::Gls,
            slot: 0,
        });
        let layout = build_panels(&cp, best, &MethodTag::ALL, DEFAULT_IMAGE_MIME);
        let rows = panel_rows(&layout);

        let shape: Vec<_> = rows.iter().map(|r| (r.method, r.panel, r.slot)).collect();
        assert_eq!(
            shape,
            vec![
                (MethodTag::Pdm, "periodogram", None),
                (MethodTag::Gls, "periodogram", None),
                (MethodTag::Gls, "candidate", Some(0)),
            ]
        );
        assert!(rows[2].best);
        assert_eq!(rows[0].image_bytes, 0);
        assert_eq!(rows[1].image_bytes, 4);
        assert_eq!(rows[2].image_bytes, 8);
        assert!((rows[0].width - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_reports_flag_and_best() {
        let cp = checkplot();
        let summary = CheckplotSummary::new(
            "obj001.pkl",
            &cp,
            Some(BestCandidate {
                method: MethodTag::Gls,
                slot: 0,
            }),
        );
        assert_eq!(summary.objectisvar, "true");
        assert_eq!(summary.methods, vec![MethodTag::Pdm, MethodTag::Gls]);
        assert_eq!(summary.best.as_deref(), Some("gls/0"));
        assert_eq!(summary.vartags, "ceph");
    }
}
