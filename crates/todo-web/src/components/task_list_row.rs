use todo_core::{
  Action,
  TaskItem
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html,
  use_effect_with,
  use_node_ref
};

#[derive(Properties, PartialEq)]
pub struct TaskListRowProps {
  pub item:      TaskItem,
  /// `Some` while this row is in inline
  /// edit.
  pub draft:     Option<String>,
  pub on_action: Callback<Action>
}

#[function_component(TaskListRow)]
pub fn task_list_row(
  props: &TaskListRowProps
) -> Html {
  let item = &props.item;
  let input_ref = use_node_ref();
  let editing = props.draft.is_some();

  {
    let input_ref = input_ref.clone();
    use_effect_with(editing, move |editing| {
      if *editing
        && let Some(input) = input_ref
          .cast::<web_sys::HtmlInputElement>()
      {
        let _ = input.focus();
        let end = input
          .value()
          .encode_utf16()
          .count() as u32;
        let _ = input
          .set_selection_range(end, end);
      }
      || ()
    });
  }

  let emit = |action: Action| {
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |_: web_sys::MouseEvent| {
        on_action.emit(action.clone())
      }
    )
  };

  let on_title_key = {
    let on_action =
      props.on_action.clone();
    let id = item.id.clone();
    Callback::from(
      move |e: web_sys::KeyboardEvent| {
        if e.key() == "Enter" {
          on_action.emit(
            Action::BeginEdit(id.clone())
          );
        }
      }
    )
  };

  let title = match &props.draft {
    | Some(draft) => {
      let oninput = {
        let on_action =
          props.on_action.clone();
        Callback::from(
          move |e: web_sys::InputEvent| {
            if let Some(input) = e
              .target_dyn_into::<
                web_sys::HtmlInputElement
              >()
            {
              on_action.emit(
                Action::UpdateDraft(
                  input.value()
                )
              );
            }
          }
        )
      };
      let onkeydown = {
        let on_action =
          props.on_action.clone();
        Callback::from(
          move |e: web_sys::KeyboardEvent| {
            match e.key().as_str() {
              | "Enter" => {
                e.prevent_default();
                on_action
                  .emit(Action::CommitEdit);
              }
              | "Escape" => {
                e.prevent_default();
                on_action
                  .emit(Action::CancelEdit);
              }
              | _ => {}
            }
          }
        )
      };
      let onblur = {
        let on_action =
          props.on_action.clone();
        Callback::from(
          move |_: web_sys::FocusEvent| {
            on_action
              .emit(Action::CommitEdit)
          }
        )
      };
      html! {
          <input
              ref={input_ref}
              class="edit-input"
              type="text"
              value={draft.clone()}
              {oninput}
              {onkeydown}
              {onblur}
          />
      }
    }
    | None => html! {
        <div
            class="title"
            tabindex="0"
            title="Double-click to edit"
            ondblclick={emit(Action::BeginEdit(item.id.clone()))}
            onkeydown={on_title_key}
        >
            { &item.text }
        </div>
    }
  };

  html! {
      <div class={item.class()} data-id={item.id.to_string()}>
          <button
              type="button"
              class="chk"
              title={item.toggle_title()}
              aria-pressed={item.aria_pressed()}
              onclick={emit(Action::Toggle(item.id.clone()))}
          >
              { item.toggle_glyph() }
          </button>
          <div class="body">
              { title }
              <div class="meta">{ &item.created_label }</div>
          </div>
          <div class="actions">
              {
                  for item.badge().map(|badge| html! {
                      <span class="badge">{ badge }</span>
                  })
              }
              <button
                  type="button"
                  class="icon"
                  title="Edit"
                  onclick={emit(Action::BeginEdit(item.id.clone()))}
              >
                  { "✏️" }
              </button>
              <button
                  type="button"
                  class="icon danger"
                  title="Delete"
                  onclick={emit(Action::Delete(item.id.clone()))}
              >
                  { "🗑️" }
              </button>
          </div>
      </div>
  }
}
