use todo_core::{
  Action,
  Filter
};
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ListActionsProps {
  pub filter:    Filter,
  pub on_action: Callback<Action>
}

/// Filter switches plus the two bulk
/// deletes.
#[function_component(ListActions)]
pub fn list_actions(
  props: &ListActionsProps
) -> Html {
  let filter_button = |filter: Filter| {
    let on_action =
      props.on_action.clone();
    let active = props.filter == filter;
    html! {
        <button
            type="button"
            id={format!("{}Btn", filter.as_key())}
            class={classes!("filter", active.then_some("active"))}
            aria-pressed={if active { "true" } else { "false" }}
            onclick={move |_| on_action.emit(Action::SetFilter(filter))}
        >
            { filter.label() }
        </button>
    }
  };

  let on_clear_completed = {
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |_: web_sys::MouseEvent| {
        on_action
          .emit(Action::ClearCompleted)
      }
    )
  };
  let on_clear_all = {
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |_: web_sys::MouseEvent| {
        on_action.emit(Action::ClearAll)
      }
    )
  };

  html! {
      <div class="list-actions">
          <div class="filters">
              { for Filter::ALL.into_iter().map(filter_button) }
          </div>
          <div class="bulk">
              <button type="button" id="clearCompleted" onclick={on_clear_completed}>
                  { "Clear completed" }
              </button>
              <button type="button" id="clearAll" class="danger" onclick={on_clear_all}>
                  { "Clear all" }
              </button>
          </div>
      </div>
  }
}
