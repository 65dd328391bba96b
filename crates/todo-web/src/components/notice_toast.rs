use todo_core::Notice;
use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct NoticeToastProps {
  pub notice: Option<Notice>
}

#[function_component(NoticeToast)]
pub fn notice_toast(
  props: &NoticeToastProps
) -> Html {
  match &props.notice {
    | Some(notice) => {
      let class = if notice.is_error() {
        "toast error"
      } else {
        "toast"
      };
      html! {
          <div id="toast" class={class} role="status" aria-live="polite">
              { &notice.message }
          </div>
      }
    }
    | None => html! {
        <div id="toast" class="toast" style="display:none"></div>
    }
  }
}
