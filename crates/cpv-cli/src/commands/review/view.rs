//! What the review loop prints about the session.

use cpv_core::MethodTag;
use cpv_review::{Backend, Controller, QueueNavigator, ReviewQueue};
use serde::Serialize;

/// The current checkplot as the reviewer is editing it.
///
/// Text fields come from the edit form, so they show input that has not
/// been saved yet.
#[derive(Debug, Serialize)]
pub struct StatusView<'a> {
    pub phase: &'static str,
    pub identifier: Option<&'a str>,
    pub position: Option<String>,
    pub objectid: Option<&'a str>,
    pub objectisvar: &'static str,
    pub varperiod: Option<f64>,
    pub varepoch: Option<f64>,
    pub vartags: &'a str,
    pub objecttags: &'a str,
    pub comments: &'a str,
    pub best: Option<String>,
    pub methods: Vec<MethodTag>,
    pub saved_this_session: usize,
}

impl<'a> StatusView<'a> {
    pub fn new<B: Backend>(controller: &'a Controller<B, ReviewQueue>) -> Self {
        let store = controller.store();
        let form = controller.form();
        Self {
            phase: controller.phase().as_str(),
            identifier: store.identifier(),
            position: store
                .index()
                .map(|index| format!("{}/{}", index + 1, controller.queue().len())),
            objectid: store.checkplot().map(|cp| cp.objectid.as_str()),
            objectisvar: form.variability.as_str(),
            varperiod: form.period,
            varepoch: form.epoch,
            vartags: &form.vartags,
            objecttags: &form.objecttags,
            comments: &form.comments,
            best: store.best().map(|b| format!("{}/{}", b.method, b.slot)),
            methods: store
                .checkplot()
                .map(|cp| cp.present_methods().collect())
                .unwrap_or_default(),
            saved_this_session: controller.updates().len(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct QueueRow<'a> {
    pub position: usize,
    pub identifier: &'a str,
    pub current: bool,
    pub saves: usize,
}

pub fn queue_rows<B: Backend>(controller: &Controller<B, ReviewQueue>) -> Vec<QueueRow<'_>> {
    let current = controller.queue().highlighted();
    controller
        .queue()
        .entries()
        .enumerate()
        .map(|(index, identifier)| QueueRow {
            position: index + 1,
            identifier,
            current: current == Some(index),
            saves: controller.updates().for_object(identifier).len(),
        })
        .collect()
}

/// Prompt shown before each command when stdin is a terminal.
pub fn prompt<B: Backend>(controller: &Controller<B, ReviewQueue>) -> String {
    let store = controller.store();
    match (store.identifier(), store.index()) {
        (Some(identifier), Some(index)) => format!(
            "cpv [{}/{} {identifier}]> ",
            index + 1,
            controller.queue().len()
        ),
        (Some(identifier), None) => format!("cpv [{identifier}]> "),
        _ => "cpv> ".to_string(),
    }
}
