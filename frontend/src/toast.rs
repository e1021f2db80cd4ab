use std::rc::Rc;

use gloo_timers::callback::Timeout;
use yew::prelude::*;
use yew::{AppHandle, Renderer};

use crate::site::Page;

pub const CONTAINER_ID: &str = "toast-container";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn class(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub removing: bool,
}

/// Live toasts in creation order.
#[derive(Debug, Default)]
pub struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, message: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            kind,
            message,
            removing: false,
        });
        id
    }

    /// Marks a toast as leaving. Returns false for unknown or already-leaving ids.
    pub fn begin_removal(&mut self, id: u64) -> bool {
        match self.toasts.iter_mut().find(|t| t.id == id && !t.removing) {
            Some(toast) => {
                toast.removing = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}

pub enum ToastMsg {
    Push(ToastKind, String),
    BeginRemoval(u64),
    Remove(u64),
}

#[derive(Properties, PartialEq)]
pub struct ToastStackProps {
    pub visible_ms: u32,
    pub exit_ms: u32,
}

pub struct ToastStack {
    queue: ToastQueue,
}

impl Component for ToastStack {
    type Message = ToastMsg;
    type Properties = ToastStackProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            queue: ToastQueue::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ToastMsg::Push(kind, message) => {
                let id = self.queue.push(kind, message);
                log::debug!("Showing toast {} ({} on screen)", id, self.queue.len());
                let link = ctx.link().clone();
                Timeout::new(ctx.props().visible_ms, move || {
                    link.send_message(ToastMsg::BeginRemoval(id));
                })
                .forget();
                true
            }
            ToastMsg::BeginRemoval(id) => {
                if !self.queue.begin_removal(id) {
                    return false;
                }
                let link = ctx.link().clone();
                Timeout::new(ctx.props().exit_ms, move || {
                    link.send_message(ToastMsg::Remove(id));
                })
                .forget();
                true
            }
            ToastMsg::Remove(id) => self.queue.remove(id),
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <>
                { for self.queue.iter().map(|toast| html! {
                    <div
                        key={toast.id.to_string()}
                        class={classes!("toast", toast.kind.class(), toast.removing.then_some("removing"))}
                        role="status"
                    >
                        { toast.message.clone() }
                    </div>
                }) }
            </>
        }
    }
}

/// Entry point other behaviors use to show a toast.
#[derive(Clone)]
pub struct Notifier {
    stack: Option<Rc<AppHandle<ToastStack>>>,
}

impl Notifier {
    pub fn mount(page: &Page) -> Self {
        let stack = page.document.get_element_by_id(CONTAINER_ID).map(|container| {
            let props = ToastStackProps {
                visible_ms: page.config.toast_visible_ms,
                exit_ms: page.config.toast_exit_ms,
            };
            Rc::new(Renderer::<ToastStack>::with_root_and_props(container, props).render())
        });
        if stack.is_none() {
            log::debug!("No #{}, notifications go to the console", CONTAINER_ID);
        }
        Self { stack }
    }

    pub fn notify(&self, message: &str, kind: ToastKind) {
        match &self.stack {
            Some(stack) => stack.send_message(ToastMsg::Push(kind, message.to_string())),
            None => log::info!("[{}] {}", kind.class(), message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_stack_in_creation_order() {
        let mut queue = ToastQueue::default();
        let first = queue.push(ToastKind::Success, "sent".into());
        let second = queue.push(ToastKind::Error, "failed".into());
        let ids: Vec<u64> = queue.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_ne!(first, second);
    }

    #[test]
    fn removal_is_two_phase() {
        let mut queue = ToastQueue::default();
        let id = queue.push(ToastKind::Success, "hello".into());
        assert!(queue.begin_removal(id));
        assert!(queue.iter().next().unwrap().removing);
        assert_eq!(queue.len(), 1);
        assert!(!queue.begin_removal(id));
        assert!(queue.remove(id));
        assert_eq!(queue.len(), 0);
        assert!(!queue.remove(id));
    }

    #[test]
    fn removing_one_keeps_the_rest_in_order() {
        let mut queue = ToastQueue::default();
        let a = queue.push(ToastKind::Success, "a".into());
        let b = queue.push(ToastKind::Success, "b".into());
        let c = queue.push(ToastKind::Success, "c".into());
        queue.remove(b);
        let ids: Vec<u64> = queue.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn kind_classes() {
        assert_eq!(ToastKind::Success.class(), "success");
        assert_eq!(ToastKind::Error.class(), "error");
    }
}
