mod storage;

use chrono::Local;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use todo_core::{
  Action,
  Controller,
  NoticeBoard,
  Persistence,
  Snapshot
};
use wasm_bindgen::JsCast;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_state
};

use crate::components::{
  ListActions,
  NewTaskForm,
  NoticeToast,
  TaskList
};
use storage::BrowserStore;

type BrowserController =
  Controller<BrowserStore, fn(&str) -> bool>;

fn browser_confirm(
  prompt: &str
) -> bool {
  web_sys::window()
    .and_then(|window| {
      window
        .confirm_with_message(prompt)
        .ok()
    })
    .unwrap_or(false)
}

fn start_controller() -> BrowserController
{
  Controller::start(
    Persistence::new(
      BrowserStore::open()
    ),
    browser_confirm as fn(&str) -> bool,
    NoticeBoard::default()
  )
}

#[function_component(App)]
pub fn app() -> Html {
  let controller =
    use_mut_ref(start_controller);
  let snapshot = {
    let controller = controller.clone();
    use_state(move || {
      controller.borrow().snapshot(&Local)
    })
  };
  let new_text = use_state(String::new);

  let dispatch = {
    let controller = controller.clone();
    let snapshot = snapshot.clone();
    let new_text = new_text.clone();
    Callback::from(
      move |action: Action| {
        let is_submit = matches!(
          action,
          Action::Submit(_)
        );
        let took_effect = controller
          .borrow_mut()
          .dispatch(action);
        if is_submit && took_effect {
          new_text.set(String::new());
        }
        snapshot.set(
          controller
            .borrow()
            .snapshot(&Local)
        );
      }
    )
  };

  {
    let dispatch = dispatch.clone();
    use_effect_with((), move |_| {
      let listener =
        web_sys::window().map(|window| {
          EventListener::new(
            &window,
            "storage",
            move |event| {
              let key = event
                .dyn_ref::<web_sys::StorageEvent>()
                .and_then(|event| {
                  event.key()
                });
              tracing::debug!(
                ?key,
                "storage event"
              );
              dispatch.emit(
                Action::StorageChanged {
                  key
                }
              );
            }
          )
        });
      move || drop(listener)
    });
  }

  {
    let controller = controller.clone();
    let snapshot_handle =
      snapshot.clone();
    let notice = snapshot.notice.clone();
    use_effect_with(
      notice.as_ref().map(|n| n.ticket),
      move |_| {
        // Dropping the previous
        // Timeout on re-run cancels it.
        let timer = notice.map(|notice| {
          let ticket = notice.ticket;
          let millis = u32::try_from(
            notice.duration.as_millis()
          )
          .unwrap_or(u32::MAX);
          Timeout::new(millis, move || {
            let dismissed = controller
              .borrow_mut()
              .dismiss_notice(ticket);
            if dismissed {
              snapshot_handle.set(
                controller
                  .borrow()
                  .snapshot(&Local)
              );
            }
          })
        });
        move || drop(timer)
      }
    );
  }

  let on_new_text = {
    let new_text = new_text.clone();
    Callback::from(
      move |value: String| {
        new_text.set(value)
      }
    )
  };

  let Snapshot {
    list,
    editing,
    notice
  } = (*snapshot).clone();

  html! {
      <main class="todo-app">
          <h1>{ "To-Do" }</h1>
          <NewTaskForm
              value={(*new_text).clone()}
              on_input={on_new_text}
              on_action={dispatch.clone()}
          />
          <ListActions
              filter={list.filter}
              on_action={dispatch.clone()}
          />
          <TaskList
              list={list.clone()}
              editing={editing}
              on_action={dispatch}
          />
          <div id="count" class="count">{ list.count_label() }</div>
          <NoticeToast notice={notice} />
      </main>
  }
}
