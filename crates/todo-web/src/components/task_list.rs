use todo_core::{
  Action,
  ListView,
  TaskId
};
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TaskListRow;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub list:      ListView,
  pub editing:   Option<(TaskId, String)>,
  pub on_action: Callback<Action>
}

/// Rebuilt from the list view on every
/// state change.
#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  if let Some(message) = props.list.empty
  {
    return html! {
        <div id="taskList" class="task-list">
            <div class="empty">{ message }</div>
        </div>
    };
  }

  html! {
      <div id="taskList" class="task-list">
          {
              for props.list.items.iter().cloned().map(|item| {
                  let draft = props
                      .editing
                      .as_ref()
                      .filter(|(id, _)| *id == item.id)
                      .map(|(_, draft)| draft.clone());
                  let key = item.id.to_string();
                  html! {
                      <TaskListRow
                          key={key}
                          item={item}
                          draft={draft}
                          on_action={props.on_action.clone()}
                      />
                  }
              })
          }
      </div>
  }
}
