pub mod assistant_panel;
pub mod chat_view;
pub mod destination_form;
pub mod trip_detail;
pub mod trip_form;
pub mod trip_list;
