mod list;
mod show;

pub(crate) use list::cmd_list;
pub(crate) use show::cmd_show;
