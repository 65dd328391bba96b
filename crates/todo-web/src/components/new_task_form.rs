use todo_core::Action;
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct NewTaskFormProps {
  pub value:     String,
  pub on_input:  Callback<String>,
  pub on_action: Callback<Action>
}

#[function_component(NewTaskForm)]
pub fn new_task_form(
  props: &NewTaskFormProps
) -> Html {
  let oninput = {
    let on_input = props.on_input.clone();
    Callback::from(
      move |e: web_sys::InputEvent| {
        if let Some(input) = e
          .target_dyn_into::<
            web_sys::HtmlInputElement
          >()
        {
          on_input.emit(input.value());
        }
      }
    )
  };

  let onkeydown = {
    let on_action =
      props.on_action.clone();
    let value = props.value.clone();
    Callback::from(
      move |e: web_sys::KeyboardEvent| {
        if e.key() == "Enter" {
          e.prevent_default();
          on_action.emit(Action::Submit(
            value.clone()
          ));
        }
      }
    )
  };

  let onclick = {
    let on_action =
      props.on_action.clone();
    let value = props.value.clone();
    Callback::from(
      move |_: web_sys::MouseEvent| {
        on_action.emit(Action::Submit(
          value.clone()
        ));
      }
    )
  };

  html! {
      <div class="new-task">
          <input
              id="newTask"
              type="text"
              placeholder="What needs doing?"
              value={props.value.clone()}
              {oninput}
              {onkeydown}
          />
          <button type="button" id="addBtn" {onclick}>{ "Add" }</button>
      </div>
  }
}
